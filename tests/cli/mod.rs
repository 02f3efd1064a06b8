pub mod support;

mod exchange;
mod misc;
mod new_json;
mod search;
