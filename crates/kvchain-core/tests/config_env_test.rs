//! Environment overrides. Kept in its own test binary: it mutates process env.

use std::io::Write;

use kvchain_core::constants::{DB_PATH_ENV_VAR, MACHINE_ID_ENV_VAR};
use kvchain_core::KvConfig;

#[test]
fn env_overrides_file_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[storage]\ndb_path = \"file.db\"\n\n[replica]\nmachine_id = \"from-file\""
    )
    .unwrap();

    std::env::set_var(DB_PATH_ENV_VAR, "/tmp/env.db");
    std::env::set_var(MACHINE_ID_ENV_VAR, "from-env");
    let config = KvConfig::load(file.path());
    std::env::remove_var(DB_PATH_ENV_VAR);
    std::env::remove_var(MACHINE_ID_ENV_VAR);

    let config = config.unwrap();
    assert_eq!(config.storage.db_path, "/tmp/env.db");
    assert_eq!(config.replica.machine_id, "from-env");
}
