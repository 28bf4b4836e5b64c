pub mod air_data_api;
