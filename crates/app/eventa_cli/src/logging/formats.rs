use flexi_logger::{DeferredNow, style};
use log::{Level, Record};

/// `LEVEL message`, coloured by level. Debug and trace lines also carry the
/// module path.
pub fn cli_format(
    w: &mut dyn std::io::Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    let level = record.level();
    let label = style(level).paint(format!("{level:<5}"));
    if level >= Level::Debug {
        write!(
            w,
            "{label} [{}] {}",
            record.module_path().unwrap_or("<unnamed>"),
            record.args()
        )
    } else {
        write!(w, "{label} {}", record.args())
    }
}
