mod generator;
mod policies;
mod traffic_light;
