use std::io::{self, Read};

/// Reads a single byte from the terminal in raw mode.
///
/// Canonical line buffering and echo are disabled for the duration of the
/// read and the previous terminal state is restored afterwards, so the byte
/// arrives as soon as the key is pressed. A `0x03` byte (Ctrl-C) raises
/// `SIGINT` before returning, matching ordinary terminal behavior.
///
/// # Errors
/// Returns an `io::Error` if the terminal attributes cannot be read or
/// restored, or if standard input is closed.
#[cfg(unix)]
pub fn read_byte_raw() -> io::Result<u8> {
    use std::{mem::MaybeUninit, os::fd::AsRawFd};

    let fd = io::stdin().as_raw_fd();

    let mut previous = MaybeUninit::<libc::termios>::uninit();
    if unsafe { libc::tcgetattr(fd, previous.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let previous = unsafe { previous.assume_init() };

    let mut raw = previous;
    raw.c_lflag &= !(libc::ICANON | libc::ECHO);
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
        return Err(io::Error::last_os_error());
    }

    let mut byte = [0u8; 1];
    let result = io::stdin().read_exact(&mut byte);

    // Restore before reporting the read result.
    unsafe { libc::tcsetattr(fd, libc::TCSANOW, &previous) };
    result?;

    if byte[0] == 3 {
        unsafe { libc::raise(libc::SIGINT) };
    }
    Ok(byte[0])
}

/// Reads a single byte from standard input.
///
/// Raw-mode reads are not implemented on this platform, so the read is line
/// buffered.
#[cfg(not(unix))]
pub fn read_byte_raw() -> io::Result<u8> {
    let mut byte = [0u8; 1];
    io::stdin().read_exact(&mut byte)?;
    Ok(byte[0])
}

/// Clears the terminal by invoking the platform clear command.
///
/// Failures are ignored; a terminal that cannot be cleared is not an
/// interpreter error.
pub fn clear_terminal() {
    #[cfg(windows)]
    let status = std::process::Command::new("cmd").args(["/C", "cls"]).status();
    #[cfg(not(windows))]
    let status = std::process::Command::new("clear").status();
    drop(status);
}
