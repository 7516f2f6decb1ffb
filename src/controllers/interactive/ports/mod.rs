//! Interfaces between the interactive controller and whatever displays its output.

pub mod presenter_port;
