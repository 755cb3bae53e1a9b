//! Screen-space passes run after the two scene renders.
//!
//! Bloom extracts and blurs the bright parts of the live skeleton image;
//! the x-ray composite blends the skin capture over it through the reveal
//! mask and writes the presented frame.

pub mod bloom;
pub(crate) mod post_process;
pub(crate) mod screen_pass;
pub mod xray_composite;
