pub mod edge_flips;
pub mod hvw;
pub mod prim_dijkstra;
