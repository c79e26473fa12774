
use rstest::*;
use cf_testutils::*;
use tracing_test::traced_test;

use super::*;
