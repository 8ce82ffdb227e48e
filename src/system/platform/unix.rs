use std::io;
use std::mem;
use std::sync::{Mutex, PoisonError};

use crate::error::MetricError;
use crate::system::identity::SystemIdentity;
use crate::system::snapshot::SessionRecord;

// getutxent walks a process-global cursor.
static UTMPX_CURSOR: Mutex<()> = Mutex::new(());

fn c_field(raw: &[libc::c_char]) -> String {
    let bytes: Vec<u8> = raw
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn sessions() -> Result<Vec<SessionRecord>, MetricError> {
    let _cursor = UTMPX_CURSOR
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let mut sessions = Vec::new();
    // SAFETY: the cursor lock serialises every walk of the utmpx database, and
    // each returned entry is copied out before the next getutxent call.
    unsafe {
        libc::setutxent();
        loop {
            let entry = libc::getutxent();
            if entry.is_null() {
                break;
            }
            let entry = &*entry;
            if entry.ut_type == libc::USER_PROCESS {
                sessions.push(SessionRecord {
                    user: c_field(&entry.ut_user),
                    terminal_line: c_field(&entry.ut_line),
                    host: c_field(&entry.ut_host),
                });
            }
        }
        libc::endutxent();
    }

    Ok(sessions)
}

pub fn identity() -> Result<SystemIdentity, MetricError> {
    // SAFETY: utsname is plain old data; uname fills it completely on success.
    let mut uts: libc::utsname = unsafe { mem::zeroed() };
    if unsafe { libc::uname(&mut uts) } == -1 {
        return Err(MetricError::query_failed(format!(
            "uname: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(SystemIdentity {
        system_name: c_field(&uts.sysname),
        machine_name: c_field(&uts.nodename),
        version: c_field(&uts.version),
        release: c_field(&uts.release),
        architecture: c_field(&uts.machine),
    })
}

/// Raw `ru_maxrss` for this process; the unit is platform-defined.
pub fn max_rss() -> Result<u64, MetricError> {
    // SAFETY: rusage is plain old data; getrusage fills it completely on success.
    let mut usage: libc::rusage = unsafe { mem::zeroed() };
    if unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) } != 0 {
        return Err(MetricError::query_failed(format!(
            "getrusage: {}",
            io::Error::last_os_error()
        )));
    }
    Ok(u64::try_from(usage.ru_maxrss).unwrap_or(0))
}
