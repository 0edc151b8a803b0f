pub mod water_gov_ge;
