pub mod portal_api;
