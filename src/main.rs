use penrose::{
    builtin::layout,
    core::{bindings::KeyBindings, restart, Config, WindowManager},
    x::XConn,
    x11rb::Conn,
};
use std::{collections::HashMap, env, process};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("error running penrose: {e}");
        process::exit(1);
    }
}

fn run() -> penrose::Result<()> {
    let args: Vec<String> = env::args().collect();

    let resume_payload = match args.as_slice() {
        [_] => None,
        [_, flag, payload] if flag == "--resume" => Some(payload.clone()),
        _ => {
            eprintln!("usage: penrose [--resume <state>]");
            process::exit(1);
        }
    };

    let conn = Conn::new()?;

    // Queried up front, before `conn` is moved into the `WindowManager`: a
    // resume needs to reconcile the persisted state against whatever is
    // actually on the X server right now rather than trust the snapshot.
    let resumed_client_set = match &resume_payload {
        Some(encoded) => {
            let registry = layout::registry();
            let screen_details = conn.screen_details()?;
            let existing_clients = conn.existing_clients()?;
            Some(restart::decode_client_set(encoded, &registry, screen_details, &existing_clients)?)
        }
        None => None,
    };

    let config = Config::default();

    // A real config should populate these with user defined key / mouse
    // bindings: penrose is a library and ships without an opinion on
    // keybindings. See `examples/` for a worked configuration.
    let key_bindings: KeyBindings<Conn<x11rb::rust_connection::RustConnection>> = HashMap::new();
    let mouse_bindings = HashMap::new();

    let mut wm = WindowManager::new(config, key_bindings, mouse_bindings, conn)?;

    if let Some(client_set) = resumed_client_set {
        wm.state.client_set = client_set;
    }

    wm.run()
}
