mod bucket;
mod layout;
mod session;

pub use bucket::{bucket_len, bucketize, Buckets, DayBuckets};
pub use layout::{
    block_height_px, layout, top_offset_px, BlockInstruction, CellInstruction, CellKind,
    LayoutConfig, LayoutError,
};
pub use session::Session;

#[cfg(test)]
pub(crate) use session::session;
