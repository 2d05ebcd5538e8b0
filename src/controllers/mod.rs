pub mod design_controller;
