#[cfg(feature = "vis")]
pub mod bhsim_vis2d;
