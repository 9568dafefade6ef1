#![allow(clippy::unwrap_used)]

use emsprobe::prelude::*;

#[test]
fn prelude_covers_offline_use() {
    let entry = &catalog::builtin()[0];
    let env = Envelope::parse(entry.request).unwrap();
    assert_eq!(env.describe(), entry.label);

    let fixtures = BuiltinFixtures.fixtures().unwrap();
    assert!(fixtures.iter().all(|f| f.label().starts_with("EMS_BROWSE")));

    assert!(compare_responses(r#"{"a":1,"b":2}"#, r#"{"b":2,"a":1}"#).pass);
}
