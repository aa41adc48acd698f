pub mod use_chain_status;
