pub mod notation;
pub mod note;
pub mod output;
pub mod pmlc;
pub mod score;
pub mod synth;
pub mod wave;
