use std::{env, path::Path, process::Stdio};

use anyhow::Result;
use sysinfo::{get_current_pid, Signal, System};

pub fn kill_previous_servers(name: &Path) {
    let system = System::new_all();
    let current_id = get_current_pid().unwrap();
    for (pid, process) in system.processes().iter() {
        if *pid == current_id {
            continue;
        }
        if matches!(process.parent(), Some(p) if p == current_id) {
            continue;
        }

        if process
            .exe()
            .filter(|v| v.exists())
            .filter(|v| name == *v)
            .is_some()
        {
            // This will forcefully terminate the process on Windows. Anything better will require
            // a lot more work.
            if process.kill_with(Signal::Term).is_none() {
                process.kill();
            }
            process.wait();
        }
    }
}

/// Intended for shutting down previous server and starting new one. Currently for simplicity sake
/// it operates using a detached process. This is not great but it's not as hard to configure.
pub fn restart_server(dir: Option<&Path>) -> Result<()> {
    // The program use executable passed into the process. It's not the best option but it will do
    // the job in most cases.
    let process_name = env::current_exe().expect("Can't operate without an executable");
    kill_previous_servers(&process_name);
    let mut command = serve_command(&process_name, dir);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
        command.stdin(Stdio::null());
        command.stdout(Stdio::null());
    }

    println!("Spawning");
    #[allow(clippy::zombie_processes)]
    let _ = command.spawn()?;
    println!("Success");
    Ok(())
}

fn serve_command(process_name: &Path, dir: Option<&Path>) -> std::process::Command {
    let mut command = std::process::Command::new(process_name);
    command.arg("serve");
    if let Some(dir) = dir {
        command.arg("--dir").arg(dir);
    }
    command
}

#[cfg(test)]
mod tests {
    use std::{ffi::OsStr, path::Path};

    use super::serve_command;

    #[test]
    fn serve_command_forwards_the_application_directory() {
        let command = serve_command(Path::new("/usr/bin/domainwatch"), Some(Path::new("/tmp/dw")));
        let args = command.get_args().collect::<Vec<_>>();
        assert_eq!(args, vec![OsStr::new("serve"), OsStr::new("--dir"), OsStr::new("/tmp/dw")]);
    }

    #[test]
    fn serve_command_without_a_directory_uses_the_default() {
        let command = serve_command(Path::new("/usr/bin/domainwatch"), None);
        let args = command.get_args().collect::<Vec<_>>();
        assert_eq!(args, vec![OsStr::new("serve")]);
    }
}
