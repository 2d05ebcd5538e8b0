pub mod design_routes;
