pub mod mock_chain;
