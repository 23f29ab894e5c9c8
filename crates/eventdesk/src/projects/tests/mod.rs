mod admission;
mod common;
mod patch;
