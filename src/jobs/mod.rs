pub mod renewal_expiry;
