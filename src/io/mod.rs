pub mod ct;
pub mod fasta;
pub mod probplot;
