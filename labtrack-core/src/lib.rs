pub mod sample_id;
pub mod sample_info;
