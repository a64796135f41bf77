pub mod builder;
pub mod outline;
pub mod triangulate;

pub use builder::{
    build_cell_mesh, build_level_meshes, build_piece_mesh, try_build_piece_mesh, Bounds, MeshError,
    MeshOptions, PieceMesh, UvFrame, Vertex,
};
pub use outline::{extract_outline, simplify_collinear, trace_outline, OutlineError, OutlineStatus, OutlineTrace};
pub use triangulate::{triangulate, Triangulation, TriangulationError, TriangulationStatus, MAX_CLIPS};
