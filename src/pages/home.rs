use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;

use crate::components::controls::Controls;
use crate::components::graph_view::{GraphCanvas, GraphSession, Legend, ViewCommand, export_png};
use crate::config::ViewConfig;
use crate::engine::HttpProvider;
use crate::engine::provider::fetch_document;

/// Fetches the bundled map and shows it with its controls.
#[component]
pub fn Home() -> impl IntoView {
	let config = ViewConfig::detect();
	let data_url = config.data_url.clone();
	let session = Rc::new(RefCell::new(GraphSession::new(config, 800.0, 600.0)));
	let legend = RwSignal::new(Legend::default());
	let status = RwSignal::new(None::<String>);
	let stored = StoredValue::new_local(session.clone());

	let on_command = Callback::new(move |command: ViewCommand| {
		stored.with_value(|session| {
			let is_load = matches!(command, ViewCommand::LoadText(_));
			let outcome = if command == ViewCommand::ExportPng {
				match export_png(&session.borrow()) {
					Ok(notice) => {
						status.set(notice);
						Ok(())
					}
					Err(e) => Err(format!("Export failed: {e:?}")),
				}
			} else {
				session
					.borrow_mut()
					.apply(command, js_sys::Date::now())
					.map_err(|e| e.to_string())
			};
			match outcome {
				Ok(()) if is_load => status.set(None),
				Ok(()) => {}
				Err(msg) => {
					error!("{msg}");
					status.set(Some(msg));
				}
			}
			legend.set(session.borrow().legend());
		});
	});

	let session_fetch = session.clone();
	spawn_local(async move {
		let (ticket, loader) = {
			let mut s = session_fetch.borrow_mut();
			(s.begin_load(), s.loader().clone())
		};
		let result = fetch_document(&HttpProvider::new(data_url), &loader).await;
		let applied = session_fetch
			.borrow_mut()
			.finish_load(ticket, result, js_sys::Date::now());
		match applied {
			Ok(true) => legend.set(session_fetch.borrow().legend()),
			Ok(false) => {}
			Err(err) => status.set(Some(err.to_string())),
		}
	});

	view! {
		<div class="app">
			<header>
				<h1>"Fiction Map"</h1>
			</header>
			{move || {
				status
					.get()
					.map(|msg| {
						view! {
							<div class="status" role="alert">
								<span>{msg}</span>
								<button on:click=move |_| status.set(None)>"Dismiss"</button>
							</div>
						}
					})
			}}
			<div class="workspace">
				<Controls legend=legend status=status on_command=on_command />
				<main class="graph-pane">
					<GraphCanvas session=session />
				</main>
			</div>
		</div>
	}
}
