use crate::task::RequestScope;
use crate::use_console;
use crate::web::route::{AppRoute, Location, Navigator};
use cbmm_shared::CloudCluster;
use cbmm_shared::protocol::CloudPagination;
use leptos::prelude::*;
use std::sync::Arc;

const PER_PAGE: u32 = 10;

#[component]
pub fn CloudPage() -> impl IntoView {
    let console = use_console();
    let scope = Arc::new(RequestScope::new());
    on_cleanup({
        let scope = scope.clone();
        move || scope.cancel_all()
    });

    let (page, set_page) = signal(1u32);
    let (clusters, set_clusters) = signal(Vec::<CloudCluster>::new());
    let (health, set_health) = signal(Option::<(String, String)>::None);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    // 页码变化时重新加载
    Effect::new({
        let console = console.clone();
        let scope = scope.clone();
        move |_| {
            let current = page.get();
            let console = console.clone();
            scope.spawn(async move {
                match console
                    .gateway
                    .list_cloud_clusters(CloudPagination::page(current, PER_PAGE))
                    .await
                {
                    Ok(result) => {
                        set_clusters.set(result.data);
                        set_error_msg.set(None);
                    }
                    Err(e) => set_error_msg.set(Some(format!("加载云端集群失败: {}", e))),
                }
            });
        }
    });

    let check_health = {
        let console = console.clone();
        let scope = scope.clone();
        move |id: String| {
            let console = console.clone();
            scope.spawn(async move {
                match console.gateway.get_cloud_cluster_health(&id).await {
                    Ok(h) => set_health.set(Some((id, h.health.unwrap_or(h.status)))),
                    Err(e) => set_error_msg.set(Some(format!("查询健康状态失败: {}", e))),
                }
            });
        }
    };

    let on_back = {
        let console = console.clone();
        move |_| console.router.navigate(Location::new(AppRoute::Clusters))
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-7xl mx-auto space-y-8">
                <div class="navbar bg-base-100 rounded-box shadow-xl">
                    <div class="flex-1">
                        <a class="btn btn-ghost text-xl">"云端集群"</a>
                    </div>
                    <div class="flex-none">
                        <button on:click=on_back class="btn btn-ghost">"返回"</button>
                    </div>
                </div>

                <Show when=move || error_msg.get().is_some()>
                    <div role="alert" class="alert alert-error">
                        <span>{move || error_msg.get().unwrap_or_default()}</span>
                    </div>
                </Show>

                <Show when=move || health.get().is_some()>
                    <div role="status" class="alert alert-info">
                        <span>{move || health.get().map(|(id, h)| format!("{}: {}", id, h)).unwrap_or_default()}</span>
                    </div>
                </Show>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body p-0 overflow-x-auto">
                        <table class="table w-full">
                            <thead>
                                <tr>
                                    <th>"名称"</th>
                                    <th>"节点"</th>
                                    <th>"服务"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=move || clusters.get()
                                    key=|c| c.id.clone()
                                    children=move |cluster| {
                                        let check_health = check_health.clone();
                                        let id = cluster.id.clone();
                                        view! {
                                            <tr>
                                                <td class="font-bold">{cluster.name}</td>
                                                <td>{cluster.nodes}</td>
                                                <td class="text-sm">{cluster.services}</td>
                                                <td>
                                                    <button class="btn btn-ghost btn-sm" on:click=move |_| check_health(id.clone())>
                                                        "健康检查"
                                                    </button>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                        <div class="join p-4">
                            <button
                                class="join-item btn"
                                disabled=move || page.get() <= 1
                                on:click=move |_| set_page.update(|p| *p = p.saturating_sub(1).max(1))
                            >
                                "«"
                            </button>
                            <button class="join-item btn">{move || page.get()}</button>
                            <button class="join-item btn" on:click=move |_| set_page.update(|p| *p += 1)>
                                "»"
                            </button>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}
