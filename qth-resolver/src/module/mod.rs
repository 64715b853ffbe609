pub mod acquisition;
pub mod call_area;
pub mod enrichment;
pub mod geodesy;
pub mod reference;
