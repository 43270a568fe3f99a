pub mod price_scale;
