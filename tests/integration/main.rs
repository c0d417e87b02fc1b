//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one node kind (or the
//! whole network) against mock adapters. All tests run on the host with
//! no real radio or GPIO.

mod actuator_tests;
mod mock_hw;
mod sensor_tests;
mod sink_tests;
