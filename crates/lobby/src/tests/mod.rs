//! Ablauf-Tests fuer Provisionierer und Handler gegen einen aufzeichnenden Transport

mod handler_tests;
mod mock_transport;
