use crate::auth::logout;
use crate::dashboard::{BucketUsage, ClusterOverview, Expandable};
use crate::task::RequestScope;
use crate::use_console;
use crate::web::route::{AppRoute, Location, Navigator};
use cbmm_shared::Cluster;
use leptos::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const LOAD_CLUSTERS: &str = "list_clusters";

#[component]
pub fn ClustersPage() -> impl IntoView {
    let console = use_console();
    let scope = Arc::new(RequestScope::new());

    let clusters = RwSignal::new(Vec::<Expandable<Cluster>>::new());
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let load_clusters = {
        let console = console.clone();
        let scope = scope.clone();
        move || {
            let console = console.clone();
            // 上一次加载未完成时跳过本次刷新
            let started = scope.spawn_exclusive(LOAD_CLUSTERS, async move {
                match console.gateway.list_clusters().await {
                    Ok(data) => {
                        // 保留已展开行的状态
                        let expanded: Vec<String> = clusters.with_untracked(|rows| {
                            rows.iter()
                                .filter(|r| r.expanded)
                                .map(|r| r.item.uuid.clone())
                                .collect()
                        });
                        let mut rows = Expandable::wrap_all(data);
                        for row in rows.iter_mut() {
                            row.expanded = expanded.contains(&row.item.uuid);
                        }
                        clusters.set(rows);
                        set_error_msg.set(None);
                    }
                    Err(e) => set_error_msg.set(Some(format!("加载集群失败: {}", e))),
                }
                set_loading.set(false);
            });
            if started {
                set_loading.set(true);
            }
        }
    };

    // 初始加载
    load_clusters();

    // 定时刷新
    let refresh_ms = console.config.refresh_interval_ms;
    if refresh_ms > 0 {
        let tick = load_clusters.clone();
        match set_interval_with_handle(tick, Duration::from_millis(refresh_ms.into())) {
            Ok(handle) => on_cleanup(move || handle.clear()),
            Err(e) => warn!(error = ?e, "could not schedule cluster refresh"),
        }
    }

    on_cleanup({
        let scope = scope.clone();
        move || scope.cancel_all()
    });

    let handle_delete = {
        let console = console.clone();
        let scope = scope.clone();
        let load_clusters = load_clusters.clone();
        move |uuid: String| {
            let console = console.clone();
            let load_clusters = load_clusters.clone();
            scope.spawn(async move {
                match console.gateway.delete_cluster(&uuid).await {
                    Ok(()) => load_clusters(),
                    Err(e) => set_error_msg.set(Some(format!("删除集群失败: {}", e))),
                }
            });
        }
    };

    let toggle = move |uuid: String| {
        clusters.update(|rows| {
            if let Some(row) = rows.iter_mut().find(|r| r.item.uuid == uuid) {
                row.toggle();
            }
        });
    };

    let on_logout = {
        let console = console.clone();
        move |_| logout(console.gateway.auth(), console.router.as_ref())
    };

    let on_cloud = {
        let console = console.clone();
        move |_| console.router.navigate(Location::new(AppRoute::Cloud))
    };

    let total = move || clusters.with(|rows| rows.len());

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-7xl mx-auto space-y-8">
                <div class="navbar bg-base-100 rounded-box shadow-xl">
                    <div class="flex-1 gap-2">
                        <a class="btn btn-ghost text-xl">"集群总览"</a>
                        <span class="badge badge-neutral">{total}</span>
                    </div>
                    <div class="flex-none gap-2">
                        <button on:click=on_cloud class="btn btn-ghost">"云端集群"</button>
                        <button on:click=on_logout class="btn btn-outline btn-error">"退出登录"</button>
                    </div>
                </div>

                <Show when=move || error_msg.get().is_some()>
                    <div role="alert" class="alert alert-error">
                        <span>{move || error_msg.get().unwrap_or_default()}</span>
                    </div>
                </Show>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body p-0 overflow-x-auto">
                        <table class="table w-full">
                            <thead>
                                <tr>
                                    <th>"名称"</th>
                                    <th>"心跳"</th>
                                    <th>"节点"</th>
                                    <th>"最后更新"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || total() == 0 && !loading.get()>
                                    <tr>
                                        <td colspan="5" class="text-center py-8 text-base-content/50">
                                            "尚未注册任何集群。"
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=move || clusters.get()
                                    key=|row| row.item.uuid.clone()
                                    children=move |row| {
                                        let overview = ClusterOverview::from(&row.item);
                                        let uuid = overview.uuid.clone();
                                        let expanded = {
                                            let uuid = uuid.clone();
                                            move || clusters.with(|rows| {
                                                rows.iter().any(|r| r.item.uuid == uuid && r.expanded)
                                            })
                                        };
                                        let toggle_uuid = uuid.clone();
                                        let delete_uuid = uuid.clone();
                                        let handle_delete = handle_delete.clone();
                                        let nodes = row.item.nodes_summary.clone();
                                        let buckets: Vec<BucketUsage> =
                                            row.item.buckets_summary.iter().map(BucketUsage::from).collect();
                                        view! {
                                            <tr class=if overview.is_healthy() { "" } else { "bg-error/10" }>
                                                <td>
                                                    <a class="link font-bold" on:click=move |_| toggle(toggle_uuid.clone())>
                                                        {overview.display_name.clone()}
                                                    </a>
                                                    {overview.enterprise.then(|| view! { <span class="badge badge-accent ml-2">"EE"</span> })}
                                                </td>
                                                <td class="text-sm">{overview.heartbeat.clone()}</td>
                                                <td>{overview.node_count} " (" {overview.unhealthy_nodes} " 异常)"</td>
                                                <td class="font-mono text-xs">{overview.last_update.to_rfc3339()}</td>
                                                <td>
                                                    <button class="btn btn-ghost btn-sm text-error" on:click=move |_| handle_delete(delete_uuid.clone())>
                                                        "删除"
                                                    </button>
                                                </td>
                                            </tr>
                                            <Show when=expanded.clone()>
                                                <tr>
                                                    <td colspan="5">
                                                        <ul class="font-mono text-xs space-y-1">
                                                            {nodes.iter().map(|node| view! {
                                                                <li>
                                                                    {node.host.clone()} " · " {node.status.clone()} " · "
                                                                    {node.version.clone()} " · " {node.services.join(",")}
                                                                </li>
                                                            }).collect_view()}
                                                            {buckets.iter().map(|bucket| view! {
                                                                <li class=if bucket.over_quota { "text-error" } else { "" }>
                                                                    {bucket.name.clone()} ": " {format!("{:.1}%", bucket.percent)}
                                                                </li>
                                                            }).collect_view()}
                                                        </ul>
                                                    </td>
                                                </tr>
                                            </Show>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>
        </div>
    }
}
