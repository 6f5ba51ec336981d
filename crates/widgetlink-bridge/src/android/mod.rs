// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android widget host via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Each trait method goes through
// `AppWidgetManager`, `RemoteViews`, `PendingIntent`, `Resources` or
// `PackageManager` in the ART runtime.
//
// ## Architecture notes
//
// The broadcast receiver that the platform invokes on widget lifecycle events
// stays on the Java/Kotlin side. It only needs to forward two things into
// Rust: "configure requested" (widget id, layout id, layout name) and
// "widget clicked" (the delivered intent, read back by `delivered_click`).
// The configure activity is wrapped by `AndroidConfigureActivity` so the
// dispatcher can report the outcome.

#![cfg(target_os = "android")]

use jni::objects::{GlobalRef, JIntArray, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};

use widgetlink_core::error::{Result, WidgetError};
use widgetlink_core::types::{
    ClickCallback, ConfigureOutcome, LaunchTarget, LayoutId, ProviderHandle, ViewId, WidgetId,
    WidgetImage,
};

use crate::descriptor::{CallbackDescriptor, EXTRA_FINGERPRINT, EXTRA_PAYLOAD, EXTRA_WIDGET_ID};
use crate::traits::{ConfigurationActivity, ViewBatch, ViewOp, WidgetHost};

// ---------------------------------------------------------------------------
// Platform constants
// ---------------------------------------------------------------------------

const RESULT_OK: i32 = -1;
const RESULT_CANCELED: i32 = 0;

const FLAG_ACTIVITY_NEW_TASK: i32 = 0x1000_0000;
const FLAG_ACTIVITY_CLEAR_TASK: i32 = 0x0000_8000;

const FLAG_UPDATE_CURRENT: i32 = 0x0800_0000;
const FLAG_IMMUTABLE: i32 = 0x0400_0000;

const ACTION_APPWIDGET_UPDATE: &str = "android.appwidget.action.APPWIDGET_UPDATE";
const EXTRA_APPWIDGET_IDS: &str = "appWidgetIds";

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Convenience: map any `jni::errors::Error` into `HostOperationFailed`.
fn jni_err(context: &str, e: jni::errors::Error) -> WidgetError {
    WidgetError::HostOperationFailed(format!("{context}: {e}"))
}

/// Run `f` with a JNI environment attached to the current thread.
///
/// A Java exception left pending by a failed call is cleared before
/// returning, otherwise every later JNI call on this thread would fail.
fn with_env<T>(vm: &JavaVM, f: impl FnOnce(&mut JNIEnv<'_>) -> Result<T>) -> Result<T> {
    let mut guard = vm
        .attach_current_thread()
        .map_err(|e| jni_err("attach_current_thread", e))?;
    let result = f(&mut *guard);
    if result.is_err() && guard.exception_check().unwrap_or(false) {
        let _ = guard.exception_describe();
        let _ = guard.exception_clear();
    }
    result
}

/// Obtain the `JavaVM` and a global reference to the hosting `Context`
/// from `ndk_context`.
fn android_context() -> Result<(JavaVM, GlobalRef)> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is guaranteed valid for the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| jni_err("failed to obtain JavaVM", e))?;

    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(WidgetError::HostOperationFailed(
            "Android context is null, native activity not initialised".into(),
        ));
    }

    let context = with_env(&vm, |env| {
        // SAFETY: the NDK guarantees this pointer is a valid global jobject
        // for the hosting Context.
        let local = unsafe { JObject::from_raw(ptr.cast()) };
        env.new_global_ref(&local)
            .map_err(|e| jni_err("new_global_ref(context)", e))
    })?;
    Ok((vm, context))
}

fn java_string(env: &mut JNIEnv<'_>, obj: JObject<'_>, context: &str) -> Result<String> {
    Ok(env
        .get_string(&JString::from(obj))
        .map_err(|e| jni_err(context, e))?
        .into())
}

fn optional_string(
    env: &mut JNIEnv<'_>,
    obj: JObject<'_>,
    context: &str,
) -> Result<Option<String>> {
    if obj.is_null() {
        return Ok(None);
    }
    java_string(env, obj, context).map(Some)
}

/// Call a no-argument `String` getter, `None` when it returns null.
fn string_getter(
    env: &mut JNIEnv<'_>,
    obj: &JObject<'_>,
    method: &str,
) -> Result<Option<String>> {
    let value = env
        .call_method(obj, method, "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err(method, e))?
        .l()
        .map_err(|e| jni_err(method, e))?;
    optional_string(env, value, method)
}

fn string_extra(
    env: &mut JNIEnv<'_>,
    intent: &JObject<'_>,
    key: &str,
) -> Result<Option<String>> {
    let j_key = env
        .new_string(key)
        .map_err(|e| jni_err("new_string(extra key)", e))?;
    let value = env
        .call_method(
            intent,
            "getStringExtra",
            "(Ljava/lang/String;)Ljava/lang/String;",
            &[JValue::Object(&j_key)],
        )
        .map_err(|e| jni_err("getStringExtra", e))?
        .l()
        .map_err(|e| jni_err("getStringExtra->l", e))?;
    optional_string(env, value, "get_string(extra)")
}

fn widget_manager<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject<'_>,
) -> Result<JObject<'local>> {
    env.call_static_method(
        "android/appwidget/AppWidgetManager",
        "getInstance",
        "(Landroid/content/Context;)Landroid/appwidget/AppWidgetManager;",
        &[JValue::Object(context)],
    )
    .map_err(|e| jni_err("AppWidgetManager.getInstance", e))?
    .l()
    .map_err(|e| jni_err("getInstance->l", e))
}

// ---------------------------------------------------------------------------
// Host struct
// ---------------------------------------------------------------------------

/// Android implementation of the widget host.
///
/// Holds the `JavaVM` and the hosting `Context`; all widget state lives on
/// the Java side.
pub struct AndroidHost {
    vm: JavaVM,
    context: GlobalRef,
    package: String,
}

impl AndroidHost {
    /// Bind to the hosting context and read its package name.
    pub fn new() -> Result<Self> {
        let (vm, context) = android_context()?;
        let package = with_env(&vm, |env| {
            let j_pkg = env
                .call_method(context.as_obj(), "getPackageName", "()Ljava/lang/String;", &[])
                .map_err(|e| jni_err("getPackageName", e))?
                .l()
                .map_err(|e| jni_err("getPackageName->l", e))?;
            java_string(env, j_pkg, "get_string(packageName)")
        })?;
        tracing::info!(%package, "Android widget host bound");
        Ok(Self {
            vm,
            context,
            package,
        })
    }

    /// Build a `RemoteViews` for `batch` in this package.
    fn remote_views<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        batch: &ViewBatch,
    ) -> Result<JObject<'local>> {
        let j_pkg = env
            .new_string(&self.package)
            .map_err(|e| jni_err("new_string(package)", e))?;
        let views = env
            .new_object(
                "android/widget/RemoteViews",
                "(Ljava/lang/String;I)V",
                &[JValue::Object(&j_pkg), JValue::Int(batch.layout.0)],
            )
            .map_err(|e| jni_err("new RemoteViews", e))?;

        for op in &batch.ops {
            match op {
                ViewOp::SetText { view, text } => {
                    let j_text = env
                        .new_string(text)
                        .map_err(|e| jni_err("new_string(text)", e))?;
                    env.call_method(
                        &views,
                        "setTextViewText",
                        "(ILjava/lang/CharSequence;)V",
                        &[JValue::Int(view.0), JValue::Object(&j_text)],
                    )
                    .map_err(|e| jni_err("setTextViewText", e))?;
                    let _ = env.delete_local_ref(j_text);
                }
                ViewOp::SetImage { view, image } => {
                    let bitmap = decode_bitmap(env, image)?;
                    env.call_method(
                        &views,
                        "setImageViewBitmap",
                        "(ILandroid/graphics/Bitmap;)V",
                        &[JValue::Int(view.0), JValue::Object(&bitmap)],
                    )
                    .map_err(|e| jni_err("setImageViewBitmap", e))?;
                    let _ = env.delete_local_ref(bitmap);
                }
                ViewOp::SetClick { view, callback } => {
                    let pending = self.pending_intent(env, callback)?;
                    env.call_method(
                        &views,
                        "setOnClickPendingIntent",
                        "(ILandroid/app/PendingIntent;)V",
                        &[JValue::Int(view.0), JValue::Object(&pending)],
                    )
                    .map_err(|e| jni_err("setOnClickPendingIntent", e))?;
                    let _ = env.delete_local_ref(pending);
                }
            }
        }
        Ok(views)
    }

    /// Turn a descriptor into a `PendingIntent` with the widget id as
    /// request code, so re-addressing replaces the live intent.
    fn pending_intent<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        callback: &CallbackDescriptor,
    ) -> Result<JObject<'local>> {
        let intent = env
            .new_object("android/content/Intent", "()V", &[])
            .map_err(|e| jni_err("new Intent(click)", e))?;

        let target = callback.target();
        let j_target_pkg = env
            .new_string(&target.package)
            .map_err(|e| jni_err("new_string(target package)", e))?;
        match &target.component {
            Some(component) => {
                let j_component = env
                    .new_string(component)
                    .map_err(|e| jni_err("new_string(component)", e))?;
                env.call_method(
                    &intent,
                    "setClassName",
                    "(Ljava/lang/String;Ljava/lang/String;)Landroid/content/Intent;",
                    &[JValue::Object(&j_target_pkg), JValue::Object(&j_component)],
                )
                .map_err(|e| jni_err("setClassName", e))?;
            }
            None => {
                env.call_method(
                    &intent,
                    "setPackage",
                    "(Ljava/lang/String;)Landroid/content/Intent;",
                    &[JValue::Object(&j_target_pkg)],
                )
                .map_err(|e| jni_err("setPackage", e))?;
            }
        }

        let j_action = env
            .new_string(callback.action())
            .map_err(|e| jni_err("new_string(action)", e))?;
        env.call_method(
            &intent,
            "setAction",
            "(Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&j_action)],
        )
        .map_err(|e| jni_err("setAction", e))?;

        let launch = callback.launch_flags();
        let mut launch_flags = 0;
        if launch.new_task {
            launch_flags |= FLAG_ACTIVITY_NEW_TASK;
        }
        if launch.clear_task {
            launch_flags |= FLAG_ACTIVITY_CLEAR_TASK;
        }
        env.call_method(
            &intent,
            "addFlags",
            "(I)Landroid/content/Intent;",
            &[JValue::Int(launch_flags)],
        )
        .map_err(|e| jni_err("addFlags(click)", e))?;

        let j_widget_key = env
            .new_string(EXTRA_WIDGET_ID)
            .map_err(|e| jni_err("new_string(EXTRA_WIDGET_ID)", e))?;
        env.call_method(
            &intent,
            "putExtra",
            "(Ljava/lang/String;I)Landroid/content/Intent;",
            &[
                JValue::Object(&j_widget_key),
                JValue::Int(callback.widget_id().0),
            ],
        )
        .map_err(|e| jni_err("putExtra(widget id)", e))?;

        for (key, value) in [
            (EXTRA_PAYLOAD, callback.payload()),
            (EXTRA_FINGERPRINT, Some(callback.fingerprint())),
        ] {
            let j_key = env
                .new_string(key)
                .map_err(|e| jni_err("new_string(extra key)", e))?;
            let j_value: JObject = match value {
                Some(value) => env
                    .new_string(value)
                    .map_err(|e| jni_err("new_string(extra value)", e))?
                    .into(),
                None => JObject::null(),
            };
            env.call_method(
                &intent,
                "putExtra",
                "(Ljava/lang/String;Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&j_key), JValue::Object(&j_value)],
            )
            .map_err(|e| jni_err("putExtra(string)", e))?;
        }

        if let Some(deep_link) = callback.deep_link() {
            let j_link = env
                .new_string(deep_link)
                .map_err(|e| jni_err("new_string(deep link)", e))?;
            let uri = env
                .call_static_method(
                    "android/net/Uri",
                    "parse",
                    "(Ljava/lang/String;)Landroid/net/Uri;",
                    &[JValue::Object(&j_link)],
                )
                .map_err(|e| jni_err("Uri.parse", e))?
                .l()
                .map_err(|e| jni_err("Uri.parse->l", e))?;
            env.call_method(
                &intent,
                "setData",
                "(Landroid/net/Uri;)Landroid/content/Intent;",
                &[JValue::Object(&uri)],
            )
            .map_err(|e| jni_err("setData", e))?;
        }

        let mut flags = 0;
        if callback.flags().update_current {
            flags |= FLAG_UPDATE_CURRENT;
        }
        if callback.flags().immutable {
            flags |= FLAG_IMMUTABLE;
        }

        env.call_static_method(
            "android/app/PendingIntent",
            "getActivity",
            "(Landroid/content/Context;ILandroid/content/Intent;I)Landroid/app/PendingIntent;",
            &[
                JValue::Object(self.context.as_obj()),
                JValue::Int(callback.request_code().0),
                JValue::Object(&intent),
                JValue::Int(flags),
            ],
        )
        .map_err(|e| jni_err("PendingIntent.getActivity", e))?
        .l()
        .map_err(|e| jni_err("getActivity->l", e))
    }

    fn apply_update(&self, widget_id: WidgetId, batch: &ViewBatch, method: &str) -> Result<()> {
        with_env(&self.vm, |env| {
            let views = self.remote_views(env, batch)?;
            let manager = widget_manager(env, self.context.as_obj())?;
            env.call_method(
                &manager,
                method,
                "(ILandroid/widget/RemoteViews;)V",
                &[JValue::Int(widget_id.0), JValue::Object(&views)],
            )
            .map_err(|e| jni_err(method, e))?;
            Ok(())
        })?;
        tracing::info!(%widget_id, method, ops = batch.ops.len(), "Android: widget updated");
        Ok(())
    }
}

/// `BitmapFactory.decodeByteArray` over the encoded image bytes.
fn decode_bitmap<'local>(env: &mut JNIEnv<'local>, image: &WidgetImage) -> Result<JObject<'local>> {
    let bytes = env
        .byte_array_from_slice(&image.encoded)
        .map_err(|e| jni_err("byte_array_from_slice", e))?;
    let bitmap = env
        .call_static_method(
            "android/graphics/BitmapFactory",
            "decodeByteArray",
            "([BII)Landroid/graphics/Bitmap;",
            &[
                JValue::Object(&bytes),
                JValue::Int(0),
                JValue::Int(image.encoded.len() as i32),
            ],
        )
        .map_err(|e| jni_err("BitmapFactory.decodeByteArray", e))?
        .l()
        .map_err(|e| jni_err("decodeByteArray->l", e))?;
    if bitmap.is_null() {
        return Err(WidgetError::ImageDecodeFailed(
            "BitmapFactory returned null".into(),
        ));
    }
    Ok(bitmap)
}

impl WidgetHost for AndroidHost {
    fn platform_name(&self) -> &str {
        "Android"
    }

    fn own_package(&self) -> &str {
        &self.package
    }

    fn widget_ids(&self, provider: &ProviderHandle) -> Result<Vec<WidgetId>> {
        with_env(&self.vm, |env| {
            let j_pkg = env
                .new_string(&provider.package)
                .map_err(|e| jni_err("new_string(provider package)", e))?;
            let j_class = env
                .new_string(&provider.class_name)
                .map_err(|e| jni_err("new_string(provider class)", e))?;
            let component = env
                .new_object(
                    "android/content/ComponentName",
                    "(Ljava/lang/String;Ljava/lang/String;)V",
                    &[JValue::Object(&j_pkg), JValue::Object(&j_class)],
                )
                .map_err(|e| jni_err("new ComponentName", e))?;

            let manager = widget_manager(env, self.context.as_obj())?;
            let ids = env
                .call_method(
                    &manager,
                    "getAppWidgetIds",
                    "(Landroid/content/ComponentName;)[I",
                    &[JValue::Object(&component)],
                )
                .map_err(|e| jni_err("getAppWidgetIds", e))?
                .l()
                .map_err(|e| jni_err("getAppWidgetIds->l", e))?;
            if ids.is_null() {
                return Ok(Vec::new());
            }

            let ids = JIntArray::from(ids);
            let len = env
                .get_array_length(&ids)
                .map_err(|e| jni_err("get_array_length", e))?;
            let mut buf = vec![0i32; len as usize];
            env.get_int_array_region(&ids, 0, &mut buf)
                .map_err(|e| jni_err("get_int_array_region", e))?;
            Ok(buf.into_iter().map(WidgetId).collect())
        })
    }

    fn widget_exists(&self, widget_id: WidgetId) -> Result<bool> {
        with_env(&self.vm, |env| {
            let manager = widget_manager(env, self.context.as_obj())?;
            let info = env
                .call_method(
                    &manager,
                    "getAppWidgetInfo",
                    "(I)Landroid/appwidget/AppWidgetProviderInfo;",
                    &[JValue::Int(widget_id.0)],
                )
                .map_err(|e| jni_err("getAppWidgetInfo", e))?
                .l()
                .map_err(|e| jni_err("getAppWidgetInfo->l", e))?;
            Ok(!info.is_null())
        })
    }

    // Resource ids are package-wide, so the layout does not narrow the lookup.
    fn resolve_view(&self, _layout: LayoutId, name: &str) -> Result<Option<ViewId>> {
        with_env(&self.vm, |env| {
            let resources = env
                .call_method(
                    self.context.as_obj(),
                    "getResources",
                    "()Landroid/content/res/Resources;",
                    &[],
                )
                .map_err(|e| jni_err("getResources", e))?
                .l()
                .map_err(|e| jni_err("getResources->l", e))?;

            let j_name = env
                .new_string(name)
                .map_err(|e| jni_err("new_string(view name)", e))?;
            let j_type = env
                .new_string("id")
                .map_err(|e| jni_err("new_string(id)", e))?;
            let j_pkg = env
                .new_string(&self.package)
                .map_err(|e| jni_err("new_string(package)", e))?;

            let id = env
                .call_method(
                    &resources,
                    "getIdentifier",
                    "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)I",
                    &[
                        JValue::Object(&j_name),
                        JValue::Object(&j_type),
                        JValue::Object(&j_pkg),
                    ],
                )
                .map_err(|e| jni_err("getIdentifier", e))?
                .i()
                .map_err(|e| jni_err("getIdentifier->i", e))?;

            Ok((id != 0).then_some(ViewId(id)))
        })
    }

    fn launch_target(&self, package: &str) -> Result<Option<LaunchTarget>> {
        with_env(&self.vm, |env| {
            let pm = env
                .call_method(
                    self.context.as_obj(),
                    "getPackageManager",
                    "()Landroid/content/pm/PackageManager;",
                    &[],
                )
                .map_err(|e| jni_err("getPackageManager", e))?
                .l()
                .map_err(|e| jni_err("getPackageManager->l", e))?;

            let j_pkg = env
                .new_string(package)
                .map_err(|e| jni_err("new_string(target package)", e))?;
            let intent = env
                .call_method(
                    &pm,
                    "getLaunchIntentForPackage",
                    "(Ljava/lang/String;)Landroid/content/Intent;",
                    &[JValue::Object(&j_pkg)],
                )
                .map_err(|e| jni_err("getLaunchIntentForPackage", e))?
                .l()
                .map_err(|e| jni_err("getLaunchIntentForPackage->l", e))?;
            if intent.is_null() {
                return Ok(None);
            }

            let component = env
                .call_method(&intent, "getComponent", "()Landroid/content/ComponentName;", &[])
                .map_err(|e| jni_err("getComponent", e))?
                .l()
                .map_err(|e| jni_err("getComponent->l", e))?;
            let component = if component.is_null() {
                None
            } else {
                let j_class = env
                    .call_method(&component, "getClassName", "()Ljava/lang/String;", &[])
                    .map_err(|e| jni_err("getClassName", e))?
                    .l()
                    .map_err(|e| jni_err("getClassName->l", e))?;
                Some(java_string(env, j_class, "get_string(className)")?)
            };

            Ok(Some(LaunchTarget {
                package: package.to_owned(),
                component,
            }))
        })
    }

    fn update_widget(&mut self, widget_id: WidgetId, batch: &ViewBatch) -> Result<()> {
        self.apply_update(widget_id, batch, "updateAppWidget")
    }

    fn partially_update_widget(&mut self, widget_id: WidgetId, batch: &ViewBatch) -> Result<()> {
        self.apply_update(widget_id, batch, "partiallyUpdateAppWidget")
    }

    fn refresh_callback(&mut self, descriptor: &CallbackDescriptor) -> Result<()> {
        with_env(&self.vm, |env| {
            // FLAG_UPDATE_CURRENT swaps the extras of the live intent in place.
            let pending = self.pending_intent(env, descriptor)?;
            let _ = env.delete_local_ref(pending);
            Ok(())
        })?;
        tracing::info!(
            request_code = %descriptor.request_code(),
            "Android: click callback refreshed"
        );
        Ok(())
    }

    fn broadcast_reload(&mut self, widget_ids: &[WidgetId]) -> Result<()> {
        with_env(&self.vm, |env| {
            let raw: Vec<i32> = widget_ids.iter().map(|id| id.0).collect();
            let ids = env
                .new_int_array(raw.len() as i32)
                .map_err(|e| jni_err("new_int_array", e))?;
            env.set_int_array_region(&ids, 0, &raw)
                .map_err(|e| jni_err("set_int_array_region", e))?;

            let j_action = env
                .new_string(ACTION_APPWIDGET_UPDATE)
                .map_err(|e| jni_err("new_string(ACTION_APPWIDGET_UPDATE)", e))?;
            let intent = env
                .new_object(
                    "android/content/Intent",
                    "(Ljava/lang/String;)V",
                    &[JValue::Object(&j_action)],
                )
                .map_err(|e| jni_err("new Intent(reload)", e))?;

            // Explicit package: implicit broadcasts no longer reach
            // manifest-declared receivers.
            let j_pkg = env
                .new_string(&self.package)
                .map_err(|e| jni_err("new_string(package)", e))?;
            env.call_method(
                &intent,
                "setPackage",
                "(Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&j_pkg)],
            )
            .map_err(|e| jni_err("setPackage(reload)", e))?;

            let j_key = env
                .new_string(EXTRA_APPWIDGET_IDS)
                .map_err(|e| jni_err("new_string(EXTRA_APPWIDGET_IDS)", e))?;
            env.call_method(
                &intent,
                "putExtra",
                "(Ljava/lang/String;[I)Landroid/content/Intent;",
                &[JValue::Object(&j_key), JValue::Object(&ids)],
            )
            .map_err(|e| jni_err("putExtra(appWidgetIds)", e))?;

            env.call_method(
                self.context.as_obj(),
                "sendBroadcast",
                "(Landroid/content/Intent;)V",
                &[JValue::Object(&intent)],
            )
            .map_err(|e| jni_err("sendBroadcast", e))?;
            Ok(())
        })?;
        tracing::info!(count = widget_ids.len(), "Android: reload broadcast sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Click delivery
// ---------------------------------------------------------------------------

/// Rebuild the click descriptor from the intent a widget click delivered.
///
/// The fingerprint is taken from the extras as delivered; a missing one is
/// read as empty so the descriptor reports itself as not intact.
pub fn delivered_click(env: &mut JNIEnv<'_>, intent: &JObject<'_>) -> Result<CallbackDescriptor> {
    let action = string_getter(env, intent, "getAction")?.unwrap_or_default();

    let component = env
        .call_method(intent, "getComponent", "()Landroid/content/ComponentName;", &[])
        .map_err(|e| jni_err("getComponent", e))?
        .l()
        .map_err(|e| jni_err("getComponent->l", e))?;
    let target = if component.is_null() {
        LaunchTarget {
            package: string_getter(env, intent, "getPackage")?.unwrap_or_default(),
            component: None,
        }
    } else {
        LaunchTarget {
            package: string_getter(env, &component, "getPackageName")?.unwrap_or_default(),
            component: string_getter(env, &component, "getClassName")?,
        }
    };

    let j_widget_key = env
        .new_string(EXTRA_WIDGET_ID)
        .map_err(|e| jni_err("new_string(EXTRA_WIDGET_ID)", e))?;
    let widget_id = env
        .call_method(
            intent,
            "getIntExtra",
            "(Ljava/lang/String;I)I",
            &[JValue::Object(&j_widget_key), JValue::Int(0)],
        )
        .map_err(|e| jni_err("getIntExtra(widget id)", e))?
        .i()
        .map_err(|e| jni_err("getIntExtra->i", e))?;

    let callback = ClickCallback {
        widget_id: WidgetId(widget_id),
        payload: string_extra(env, intent, EXTRA_PAYLOAD)?,
        deep_link: string_getter(env, intent, "getDataString")?,
    };
    let fingerprint = string_extra(env, intent, EXTRA_FINGERPRINT)?.unwrap_or_default();
    Ok(CallbackDescriptor::delivered(action, &callback, target, fingerprint))
}

// ---------------------------------------------------------------------------
// Configure activity
// ---------------------------------------------------------------------------

/// The widget configure `Activity`, as seen by the dispatcher.
pub struct AndroidConfigureActivity {
    vm: JavaVM,
    activity: GlobalRef,
}

impl AndroidConfigureActivity {
    /// Wrap the configure activity the host launched.
    pub fn new(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<Self> {
        let vm = env.get_java_vm().map_err(|e| jni_err("get_java_vm", e))?;
        let activity = env
            .new_global_ref(activity)
            .map_err(|e| jni_err("new_global_ref(activity)", e))?;
        Ok(Self { vm, activity })
    }
}

impl ConfigurationActivity for AndroidConfigureActivity {
    fn set_result(&mut self, outcome: ConfigureOutcome) -> Result<()> {
        with_env(&self.vm, |env| match outcome {
            ConfigureOutcome::Committed(widget_id) => {
                let result = env
                    .new_object("android/content/Intent", "()V", &[])
                    .map_err(|e| jni_err("new Intent(result)", e))?;
                let j_key = env
                    .new_string(EXTRA_WIDGET_ID)
                    .map_err(|e| jni_err("new_string(EXTRA_WIDGET_ID)", e))?;
                env.call_method(
                    &result,
                    "putExtra",
                    "(Ljava/lang/String;I)Landroid/content/Intent;",
                    &[JValue::Object(&j_key), JValue::Int(widget_id.0)],
                )
                .map_err(|e| jni_err("putExtra(result widget id)", e))?;
                env.call_method(
                    self.activity.as_obj(),
                    "setResult",
                    "(ILandroid/content/Intent;)V",
                    &[JValue::Int(RESULT_OK), JValue::Object(&result)],
                )
                .map_err(|e| jni_err("setResult(OK)", e))?;
                Ok(())
            }
            ConfigureOutcome::Cancelled => {
                env.call_method(
                    self.activity.as_obj(),
                    "setResult",
                    "(I)V",
                    &[JValue::Int(RESULT_CANCELED)],
                )
                .map_err(|e| jni_err("setResult(CANCELED)", e))?;
                Ok(())
            }
        })
    }

    fn finish(&mut self) -> Result<()> {
        with_env(&self.vm, |env| {
            env.call_method(self.activity.as_obj(), "finish", "()V", &[])
                .map_err(|e| jni_err("finish", e))?;
            Ok(())
        })
    }
}
