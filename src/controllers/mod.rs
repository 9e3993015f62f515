pub mod point_controller;
