use crate::init::initialize;
use crate::task::RequestScope;
use crate::use_console;
use crate::web::route::{AppRoute, Location, Navigator};
use cbmm_shared::protocol::Credentials;
use leptos::prelude::*;
use std::sync::Arc;

/// 首次初始化：创建管理员账号
#[component]
pub fn SetupPage() -> impl IntoView {
    let console = use_console();
    let scope = Arc::new(RequestScope::new());
    on_cleanup({
        let scope = scope.clone();
        move || scope.cancel_all()
    });

    let (user, set_user) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_is_submitting.set(true);
        set_error_msg.set(None);

        let console = console.clone();
        let credentials = Credentials {
            user: user.get_untracked(),
            password: password.get_untracked(),
        };
        scope.spawn(async move {
            match initialize(&console.gateway, credentials).await {
                Ok(()) => console.router.navigate(Location::new(AppRoute::Login)),
                Err(e) => set_error_msg.set(Some(e.to_string())),
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"初始化"</h1>
                    <p class="text-base-content/70">"后端尚未初始化，请创建管理员账号"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <input
                            type="text"
                            placeholder="用户名"
                            on:input=move |ev| set_user.set(event_target_value(&ev))
                            prop:value=user
                            class="input input-bordered"
                            required
                        />
                        <input
                            type="password"
                            placeholder="密码"
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                            prop:value=password
                            class="input input-bordered"
                            required
                        />
                        <button class="btn btn-primary mt-4" disabled=move || is_submitting.get()>
                            "初始化"
                        </button>
                    </form>
                </div>
            </div>
        </div>
    }
}
