pub mod grooming;
