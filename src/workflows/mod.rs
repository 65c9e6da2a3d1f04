pub mod casework;
