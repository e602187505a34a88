pub mod k_shortest_paths;
pub mod path_cost;
pub mod routing;
pub mod routing_method;
