pub mod uba;
