#![no_main]

use changelog_git::{CommitRecord, parse_log_bytes};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for record in parse_log_bytes(data) {
        // Nothing the parser emits may contain a line break in a header field
        assert!(!record.subject.contains('\n'));
        assert!(!record.short_id.contains('\n'));
        let _ = CommitRecord::is_valid_id(&record.full_id);
    }
});
