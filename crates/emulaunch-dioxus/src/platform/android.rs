//! Android-specific platform functionality
//!
//! Queries the host through JNI: GLES version from the activity manager,
//! scoped storage from `Environment`, permissions through `ContextCompat`.

use emulaunch_engine::CapabilityLevel;
use jni::JNIEnv;
use jni::objects::{JObject, JValue};

const PERMISSION_GRANTED: i32 = 0; // PackageManager.PERMISSION_GRANTED
const STREAM_MUSIC: i32 = 3; // AudioManager.STREAM_MUSIC
const SDK_SCOPED_STORAGE: i32 = 29; // Android 10

/// Get the Android SDK version (Build.VERSION.SDK_INT)
fn get_sdk_version(env: &mut JNIEnv) -> Result<i32, jni::errors::Error> {
    let build_version = env.find_class("android/os/Build$VERSION")?;
    let sdk_int = env.get_static_field(build_version, "SDK_INT", "I")?;
    sdk_int.i()
}

/// ActivityManager.getDeviceConfigurationInfo().reqGlEsVersion
fn get_gles_version(env: &mut JNIEnv, context: &JObject) -> Result<i32, jni::errors::Error> {
    let service_name = env.new_string("activity")?;
    let activity_manager = env
        .call_method(
            context,
            "getSystemService",
            "(Ljava/lang/String;)Ljava/lang/Object;",
            &[JValue::Object(&service_name.into())],
        )?
        .l()?;

    let configuration_info = env
        .call_method(
            &activity_manager,
            "getDeviceConfigurationInfo",
            "()Landroid/content/pm/ConfigurationInfo;",
            &[],
        )?
        .l()?;

    env.get_field(&configuration_info, "reqGlEsVersion", "I")?.i()
}

fn check_self_permission(
    env: &mut JNIEnv,
    context: &JObject,
    permission: &str,
) -> Result<bool, jni::errors::Error> {
    // ContextCompat.checkSelfPermission(context, permission)
    let context_compat = env.find_class("androidx/core/content/ContextCompat")?;
    let permission = env.new_string(permission)?;

    let result = env.call_static_method(
        context_compat,
        "checkSelfPermission",
        "(Landroid/content/Context;Ljava/lang/String;)I",
        &[JValue::Object(context), JValue::Object(&permission.into())],
    )?;

    Ok(result.i()? == PERMISSION_GRANTED)
}

/// Open the app settings page where the user can grant storage permission
fn open_app_settings(env: &mut JNIEnv, context: &JObject) -> Result<(), jni::errors::Error> {
    // Create intent: new Intent(Settings.ACTION_APPLICATION_DETAILS_SETTINGS)
    let settings = env.find_class("android/provider/Settings")?;
    let action = env.get_static_field(
        settings,
        "ACTION_APPLICATION_DETAILS_SETTINGS",
        "Ljava/lang/String;",
    )?;

    let intent_class = env.find_class("android/content/Intent")?;
    let intent = env.new_object(
        intent_class,
        "(Ljava/lang/String;)V",
        &[JValue::Object(&action.l()?)],
    )?;

    // Set data to our package URI: Uri.parse("package:" + packageName)
    let package_name_jvalue =
        env.call_method(context, "getPackageName", "()Ljava/lang/String;", &[])?;
    let package_name_jstring: jni::objects::JString = package_name_jvalue.l()?.into();
    let package_name: String = env.get_string(&package_name_jstring)?.into();
    let uri_string = env.new_string(format!("package:{package_name}"))?;

    let uri_class = env.find_class("android/net/Uri")?;
    let uri = env.call_static_method(
        uri_class,
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&uri_string.into())],
    )?;

    env.call_method(
        &intent,
        "setData",
        "(Landroid/net/Uri;)Landroid/content/Intent;",
        &[JValue::Object(&uri.l()?)],
    )?;

    let flag_new_task: i32 = 0x10000000; // Intent.FLAG_ACTIVITY_NEW_TASK
    env.call_method(
        &intent,
        "addFlags",
        "(I)Landroid/content/Intent;",
        &[JValue::Int(flag_new_task)],
    )?;

    env.call_method(
        context,
        "startActivity",
        "(Landroid/content/Intent;)V",
        &[JValue::Object(&intent)],
    )?;

    Ok(())
}

/// Helper to run JNI operations with proper error handling
fn with_jni<F, T>(f: F) -> Option<T>
where
    F: FnOnce(&mut JNIEnv, JObject) -> Result<T, jni::errors::Error>,
{
    let ctx = ndk_context::android_context();
    let vm = unsafe { jni::JavaVM::from_raw(ctx.vm().cast()) }.ok()?;
    let mut env = vm.attach_current_thread().ok()?;
    let context = unsafe { JObject::from_raw(ctx.context().cast()) };

    match f(&mut env, context) {
        Ok(result) => Some(result),
        Err(e) => {
            log::error!("JNI error: {e}");
            None
        }
    }
}

/// Graphics capability reported by the device; zero if it cannot be read.
pub fn gles_version() -> CapabilityLevel {
    let raw = with_jni(|env, context| get_gles_version(env, &context)).unwrap_or(0);
    log::info!("Device GLES version: {raw:#x}");
    CapabilityLevel::from_raw(raw as u32)
}

/// Environment.isExternalStorageLegacy(), which only exists from Android 10.
pub fn is_external_storage_legacy() -> bool {
    with_jni(|env, _context| {
        let sdk_version = get_sdk_version(env)?;
        log::info!("Android SDK version: {sdk_version}");
        if sdk_version < SDK_SCOPED_STORAGE {
            return Ok(true);
        }
        let environment = env.find_class("android/os/Environment")?;
        env.call_static_method(environment, "isExternalStorageLegacy", "()Z", &[])?
            .z()
    })
    .unwrap_or(false)
}

pub fn check_permission(permission: &str) -> bool {
    with_jni(|env, context| check_self_permission(env, &context, permission)).unwrap_or(false)
}

/// Open app settings so the user can grant storage permission.
///
/// Returns `true` if the settings page was opened successfully.
pub fn request_permissions() -> bool {
    with_jni(|env, context| open_app_settings(env, &context)).is_some()
}

/// activity.setVolumeControlStream(AudioManager.STREAM_MUSIC)
pub fn bind_volume_to_media() {
    let bound = with_jni(|env, context| {
        env.call_method(
            &context,
            "setVolumeControlStream",
            "(I)V",
            &[JValue::Int(STREAM_MUSIC)],
        )?;
        Ok(())
    });
    if bound.is_none() {
        log::warn!("Could not route volume keys to the media stream");
    }
}

/// activity.finish()
pub fn finish_session() {
    log::info!("Finishing activity");
    if with_jni(|env, context| env.call_method(&context, "finish", "()V", &[]).map(|_| ())).is_none()
    {
        std::process::exit(0);
    }
}
