use crate::auth::login;
use crate::error::ErrorKind;
use crate::task::RequestScope;
use crate::use_console;
use crate::web::route::{AppRoute, Location, Navigator};
use cbmm_shared::protocol::Credentials;
use leptos::prelude::*;
use std::sync::Arc;

#[component]
pub fn LoginPage() -> impl IntoView {
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
            match login(&console.gateway, credentials).await {
                Ok(()) => {
                    // 登录后回到原来的深链接
                    let query = console.router.current().query;
                    console
                        .router
                        .navigate(Location::with_query(AppRoute::Clusters, query));
                }
                Err(e) if e.kind() == ErrorKind::AuthExpired => {
                    set_error_msg.set(Some("用户名或密码错误".to_string()));
                }
                Err(e) => set_error_msg.set(Some(e.to_string())),
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Cluster Monitor"</h1>
                    <p class="text-base-content/70">"请登录以继续"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="user">
                                <span class="label-text">"用户名"</span>
                            </label>
                            <input
                                id="user"
                                type="text"
                                on:input=move |ev| set_user.set(event_target_value(&ev))
                                prop:value=user
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"密码"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "登录中..." }.into_any()
                                } else {
                                    "登录".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
