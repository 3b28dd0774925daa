pub mod controls;
pub mod graph_view;
