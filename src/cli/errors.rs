use canvas_extend::ErrorKind;

/// Process exit status for each failure kind. 1 is left to panics and clap uses 2
/// for its own usage errors, which are parameter errors too.
pub fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::InvalidParameter => 2,
        ErrorKind::DecodeError => 3,
        ErrorKind::NoSubjectDetected => 4,
        ErrorKind::InvalidTargetHeight => 5,
        ErrorKind::EncodeError => 6,
        ErrorKind::ResourceError => 7,
    }
}
