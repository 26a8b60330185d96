use predicates::prelude::*;

#[test]
fn test_version_output() {
    let mut cmd = assert_cmd::cargo_bin_cmd!("procgate");
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("procgate "))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
