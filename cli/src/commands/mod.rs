pub mod bench;
pub mod derive;
pub mod info;
pub mod keygen;
pub mod scan;
