#![crate_name = "of10"]
#![crate_type = "lib"]

extern crate byteorder;
extern crate bytes;
#[macro_use]
extern crate log;
extern crate rand;

pub mod bits;
pub mod error;
pub mod ofp_utils;
pub mod packet;
pub mod ofp_header;
pub mod ofp_message;
pub mod openflow0x01;
pub mod framing;
pub mod ofp_controller;
pub mod ofp_server;
