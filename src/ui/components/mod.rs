mod devtools;
mod pagination;

pub use devtools::draw_devtools;
pub use pagination::PaginationControls;
