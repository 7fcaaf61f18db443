//! Recompiling the running binary and restarting in place.
//!
//! The protocol mirrors the one xmonad popularized: on request the currently
//! running process recompiles its own config/source tree, serializes enough
//! of its [State][crate::core::State] to survive an `exec`, then replaces its
//! own process image with the freshly built binary passed the serialized
//! state on the command line. The new process reconciles that state against
//! whatever is actually mapped on the X server before resuming normal
//! operation, since windows may have come and gone (or screens been added or
//! removed) while the recompile was running.
use crate::{
    core::{
        layout::{messages::control::ShutDown, LayoutRegistry, LayoutStack},
        ClientSet,
    },
    pure::{geometry::RelativeRect, Screen, Stack, StackSet, Workspace},
    util, Error, Result, Xid,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    os::unix::process::CommandExt,
    path::{Path, PathBuf},
    process::Command,
    time::SystemTime,
};
use tracing::{error, info, warn};

/// Configuration for locating and invoking the compiler used to rebuild this
/// binary as part of a [restart][restart].
///
/// The default is shaped for a `cargo` project: `cargo build --release`, with
/// the resulting binary expected at `<base_dir>/target/release/<program>`.
#[derive(Debug, Clone)]
pub struct RecompileConfig {
    /// The root of the source tree to recompile.
    pub base_dir: PathBuf,
    /// The compiler binary to invoke.
    pub compiler: String,
    /// Arguments passed to `compiler`.
    pub args: Vec<String>,
    /// Path to the resulting binary, relative to `base_dir`.
    pub built_binary: PathBuf,
}

impl RecompileConfig {
    /// A config for recompiling a cargo managed project rooted at `base_dir`
    /// with `cargo build --release`, producing `<base_dir>/target/release/<bin_name>`.
    pub fn cargo<P: Into<PathBuf>>(base_dir: P, bin_name: &str) -> Self {
        Self {
            base_dir: base_dir.into(),
            compiler: "cargo".to_owned(),
            args: vec!["build".to_owned(), "--release".to_owned()],
            built_binary: PathBuf::from("target/release").join(bin_name),
        }
    }

    fn binary_path(&self) -> PathBuf {
        self.base_dir.join(&self.built_binary)
    }
}

impl Default for RecompileConfig {
    /// `$HOME/.config/penrose`, generalizing the `$HOME/.xmonad` convention
    /// this protocol traces back to.
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/".to_owned());
        Self::cargo(PathBuf::from(home).join(".config/penrose"), "penrose")
    }
}

/// Recompile the source tree described by `cfg` if it looks like anything has
/// changed since the binary currently at [RecompileConfig::binary_path] was
/// built, or unconditionally if `force` is set.
///
/// A failed recompile is reported via [util::notify] and logged but is not
/// itself treated as fatal: the currently running instance simply continues
/// on its existing binary.
pub fn recompile(cfg: &RecompileConfig, force: bool) -> Result<()> {
    if !force && !source_is_newer_than_binary(cfg) {
        info!("no source changes detected, skipping recompile");
        return Ok(());
    }

    info!(compiler = %cfg.compiler, dir = %cfg.base_dir.display(), "recompiling");

    let output = Command::new(&cfg.compiler)
        .args(&cfg.args)
        .current_dir(&cfg.base_dir)
        .output()
        .map_err(|e| Error::SpawnProc(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(%stderr, "recompile failed");
        let _ = util::notify(&format!("recompile failed: {stderr}"));
        return Err(Error::SpawnProc(format!(
            "compiler exited with {}: {stderr}",
            output.status
        )));
    }

    Ok(())
}

fn source_is_newer_than_binary(cfg: &RecompileConfig) -> bool {
    let binary_mtime = match std::fs::metadata(cfg.binary_path()).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return true, // no binary yet: always build
    };

    newest_mtime_under(&cfg.base_dir) > binary_mtime
}

fn newest_mtime_under(dir: &Path) -> SystemTime {
    let mut newest = SystemTime::UNIX_EPOCH;
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return newest,
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path
            .components()
            .any(|c| c.as_os_str() == "target" || c.as_os_str() == ".git")
        {
            continue;
        }

        let mtime = if path.is_dir() {
            newest_mtime_under(&path)
        } else {
            entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH)
        };

        if mtime > newest {
            newest = mtime;
        }
    }

    newest
}

/// Broadcast [ShutDown] to every layout currently in use, serialize `client_set`
/// and `exec` the freshly built binary from `cfg`, passing the serialized state
/// as `--resume <state>`.
///
/// On success this function never returns: the process image has been
/// replaced. A returned `Err` means the `exec` call itself failed (the binary
/// is missing or not executable) and the caller is still the original process.
pub fn restart(cfg: &RecompileConfig, client_set: &mut ClientSet) -> Result<()> {
    for ws in client_set.workspaces_mut() {
        ws.layouts.broadcast_message(ShutDown);
    }

    let encoded = encode_client_set(client_set);
    let binary = cfg.binary_path();

    warn!(binary = %binary.display(), "restarting");

    let err = Command::new(&binary).arg("--resume").arg(encoded).exec();

    // exec only returns on failure
    Err(Error::SpawnProc(format!("failed to exec {}: {err}", binary.display())))
}

#[derive(Serialize, Deserialize)]
struct PersistedStack {
    up: Vec<u32>,
    focus: u32,
    down: Vec<u32>,
}

impl PersistedStack {
    fn from_stack(s: &Stack<Xid>) -> Self {
        Self {
            up: s.up.iter().rev().map(|x| x.0).collect(),
            focus: s.focus.0,
            down: s.down.iter().map(|x| x.0).collect(),
        }
    }

    fn into_stack(self) -> Stack<Xid> {
        Stack::new(
            self.up.into_iter().map(Xid::from),
            Xid::from(self.focus),
            self.down.into_iter().map(Xid::from),
        )
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedWorkspace {
    id: usize,
    tag: String,
    layouts: String,
    stack: Option<PersistedStack>,
}

impl PersistedWorkspace {
    fn from_workspace(ws: &Workspace<Xid>) -> Self {
        Self {
            id: ws.id,
            tag: ws.tag.clone(),
            layouts: ws.layouts.encode(),
            stack: ws.stack.as_ref().map(PersistedStack::from_stack),
        }
    }

    fn into_workspace(self, registry: &LayoutRegistry) -> Result<Workspace<Xid>> {
        let layouts = LayoutStack::decode(&self.layouts, registry)?;

        Ok(Workspace::new(
            self.id,
            self.tag,
            layouts,
            self.stack.map(PersistedStack::into_stack),
        ))
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedClientSet {
    n_screens: usize,
    /// Index into `workspaces[..n_screens]` of the screen that was focused
    /// when this state was encoded. `try_new_concrete` always focuses the
    /// first screen it is given, so decoding has to re-apply this explicitly
    /// rather than rely on encoding order to carry focus.
    focused_screen: usize,
    workspaces: Vec<PersistedWorkspace>,
    floating: Vec<(u32, f64, f64, f64, f64)>,
    previous_tag: String,
    invisible_tags: Vec<String>,
}

/// Serialize `client_set` to a string suitable for passing through `exec` and
/// decoding again with [decode_client_set].
///
/// Layouts are encoded with [LayoutStack::encode] rather than serde, since
/// `Box<dyn Layout>` has no derivable representation: the caller is
/// responsible for decoding with a [LayoutRegistry] that knows every concrete
/// layout type the original [Config][crate::core::Config] used.
pub fn encode_client_set(cs: &ClientSet) -> String {
    // `cs.screens()` walks the screen stack up-then-focus-then-down rather
    // than in screen index order, so it is sorted back into index order here:
    // `decode_client_set` zips these workspaces against freshly queried
    // screen geometry by position, and that pairing only lines up if the
    // encoded order matches each workspace's original screen index.
    let mut screens: Vec<&Screen<Xid>> = cs.screens().collect();
    screens.sort_by_key(|s| s.index);

    let hidden_workspaces: Vec<&Workspace<Xid>> = cs.hidden_workspaces().collect();

    let workspaces = screens
        .into_iter()
        .map(|s| &s.workspace)
        .chain(hidden_workspaces)
        .map(PersistedWorkspace::from_workspace)
        .collect();

    let floating = cs
        .floating
        .iter()
        .map(|(xid, r)| (xid.0, r.x, r.y, r.w, r.h))
        .collect();

    let persisted = PersistedClientSet {
        n_screens: cs.screens().count(),
        focused_screen: cs.current_screen().index,
        workspaces,
        floating,
        previous_tag: cs.previous_tag.clone(),
        invisible_tags: cs.invisible_tags.clone(),
    };

    serde_json::to_string(&persisted).expect("ClientSet encoding is always valid JSON")
}

/// Reconstruct a [ClientSet] from the string produced by [encode_client_set].
///
/// `screen_details` and `existing_clients` are queried fresh from the live X
/// connection rather than trusted from the encoded state, since screens may
/// have been reconfigured and clients may have closed while the recompile was
/// in flight: any persisted client id absent from `existing_clients` is
/// dropped, and if that empties a workspace's stack entirely it becomes
/// `None` rather than erroring.
pub fn decode_client_set(
    encoded: &str,
    registry: &LayoutRegistry,
    screen_details: Vec<crate::pure::geometry::Rect>,
    existing_clients: &[Xid],
) -> Result<ClientSet> {
    let persisted: PersistedClientSet = serde_json::from_str(encoded)
        .map_err(|e| Error::HydrationState(format!("invalid restart payload: {e}")))?;

    let focused_screen = persisted.focused_screen;
    let live: std::collections::HashSet<Xid> = existing_clients.iter().copied().collect();

    let mut workspaces = Vec::with_capacity(persisted.workspaces.len());
    for pw in persisted.workspaces {
        let mut ws = pw.into_workspace(registry)?;
        ws.stack = ws.stack.take().and_then(|s| retain_live_clients(s, &live));
        workspaces.push(ws);
    }

    let floating: HashMap<Xid, RelativeRect> = persisted
        .floating
        .into_iter()
        .map(|(id, x, y, w, h)| (Xid::from(id), RelativeRect::new(x, y, w, h)))
        .filter(|(xid, _)| live.contains(xid))
        .collect();

    let mut cs = StackSet::try_new_concrete(workspaces, screen_details, floating)?;
    // `try_new_concrete` always focuses whichever screen came first in
    // `workspaces`; restore the screen that was actually focused pre-restart,
    // unless the screen layout has since changed and that index no longer
    // exists (in which case the default focus from `try_new_concrete` stands).
    if cs.screens().any(|s| s.index == focused_screen) {
        cs.focus_screen(focused_screen);
    }

    Ok(cs)
}

fn retain_live_clients(s: Stack<Xid>, live: &std::collections::HashSet<Xid>) -> Option<Stack<Xid>> {
    let up: Vec<Xid> = s.up.into_iter().filter(|c| live.contains(c)).collect();
    let down: Vec<Xid> = s.down.into_iter().filter(|c| live.contains(c)).collect();

    if live.contains(&s.focus) {
        Some(Stack {
            up: up.into_iter().collect(),
            focus: s.focus,
            down: down.into_iter().collect(),
        })
    } else {
        let mut all: Vec<Xid> = up;
        all.extend(down);
        let mut iter = all.into_iter();
        let focus = iter.next()?;

        Some(Stack {
            up: std::collections::LinkedList::new(),
            focus,
            down: iter.collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builtin::layout, core::layout::LayoutStack, pure::geometry::Rect, stack};

    fn client_set(tags: &[&str]) -> ClientSet {
        let layouts: LayoutStack = stack!(layout::MainAndStack::side(1, 0.6, 0.1));
        StackSet::try_new(layouts, tags.iter().copied(), vec![Rect::new(0, 0, 1000, 800)]).unwrap()
    }

    fn two_screen_client_set(tags: &[&str]) -> ClientSet {
        let layouts: LayoutStack = stack!(layout::MainAndStack::side(1, 0.6, 0.1));
        let screens = vec![Rect::new(0, 0, 1000, 800), Rect::new(1000, 0, 1000, 800)];
        StackSet::try_new(layouts, tags.iter().copied(), screens).unwrap()
    }

    #[test]
    fn round_trips_an_empty_client_set() {
        let cs = client_set(&["1", "2", "3"]);
        let registry = layout::registry();

        let encoded = encode_client_set(&cs);
        let decoded =
            decode_client_set(&encoded, &registry, vec![Rect::new(0, 0, 1000, 800)], &[]).unwrap();

        assert_eq!(decoded.ordered_tags(), cs.ordered_tags());
    }

    #[test]
    fn clients_absent_from_the_live_x_server_are_dropped_on_resume() {
        let mut cs = client_set(&["1", "2"]);
        cs.insert(Xid::from(1));
        cs.insert(Xid::from(2));
        let registry = layout::registry();

        let encoded = encode_client_set(&cs);
        // only client 1 is still mapped
        let decoded = decode_client_set(
            &encoded,
            &registry,
            vec![Rect::new(0, 0, 1000, 800)],
            &[Xid::from(1)],
        )
        .unwrap();

        let clients: Vec<Xid> = decoded.clients().copied().collect();
        assert_eq!(clients, vec![Xid::from(1)]);
    }

    #[test]
    fn decoding_garbage_is_a_hydration_error() {
        let registry = layout::registry();
        let res = decode_client_set("not json", &registry, vec![Rect::new(0, 0, 100, 100)], &[]);
        assert!(res.is_err());
    }

    #[test]
    fn focused_screen_is_restored_across_a_two_screen_restart() {
        let mut cs = two_screen_client_set(&["1", "2", "3"]);
        cs.focus_screen(1);
        let registry = layout::registry();

        let encoded = encode_client_set(&cs);
        let screens = vec![Rect::new(0, 0, 1000, 800), Rect::new(1000, 0, 1000, 800)];
        let decoded = decode_client_set(&encoded, &registry, screens, &[]).unwrap();

        assert_eq!(decoded.current_screen().index(), 1);
    }

    #[test]
    fn restart_onto_fewer_screens_falls_back_to_the_default_focus() {
        let mut cs = two_screen_client_set(&["1", "2", "3"]);
        cs.focus_screen(1);
        let registry = layout::registry();

        let encoded = encode_client_set(&cs);
        // only one screen is present post-restart: the persisted focused
        // screen index no longer exists, so the default focus stands.
        let decoded =
            decode_client_set(&encoded, &registry, vec![Rect::new(0, 0, 1000, 800)], &[]).unwrap();

        assert_eq!(decoded.current_screen().index(), 0);
    }
}
