//! # 解码与归一化流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → 128×128 规范 PNG”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码
//! 4. 计算 contain 适配矩形（长边贴满画布，短边等比居中）
//! 5. 重采样到绘制矩形，叠加到全透明画布
//! 6. 无损 PNG 编码，并由同一份字节生成预览 Data URL

use base64::{Engine as _, engine::general_purpose};
use fast_image_resize as fr;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use super::source::{FitRect, NormalizedIcon, RawIconUpload};
use super::{IconError, IconNormalizer, NormalizerConfig};

impl IconNormalizer {
    /// 将原始字节渲染为规范图标。
    ///
    /// 同步执行整段解码→渲染→编码；调用方负责将其放到阻塞线程池上。
    pub(crate) fn render_canonical_icon(
        raw: RawIconUpload,
        config: &NormalizerConfig,
    ) -> Result<NormalizedIcon, IconError> {
        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(&raw.bytes)
            .map_err(|e| IconError::Decode(format!("图片解码失败：{}", e)))?;

        let (src_width, src_height) = decoded.dimensions();
        Self::validate_pixel_limits(config, src_width, src_height)?;
        Self::validate_decoded_memory_limits(config, src_width, src_height)?;

        let fit = Self::compute_contain_rect(src_width, src_height, config.icon_dimension);

        let src_rgba = decoded.to_rgba8();
        let drawn = if (src_width, src_height) == (fit.width, fit.height) {
            // 源已是目标绘制尺寸，跳过重采样，保证对 128×128 输入幂等。
            src_rgba
        } else {
            match Self::resize_with_fast_image_resize(&src_rgba, fit.width, fit.height, config.resize_filter) {
                Ok(resized) => resized,
                Err(err) => {
                    log::warn!("⚠️ fast_image_resize 重采样失败，回退 imageops::resize：{}", err);
                    image::imageops::resize(&src_rgba, fit.width, fit.height, config.resize_filter)
                }
            }
        };

        let mut canvas = RgbaImage::new(config.icon_dimension, config.icon_dimension);
        image::imageops::overlay(&mut canvas, &drawn, i64::from(fit.x), i64::from(fit.y));

        let png_bytes = Self::encode_png(canvas)?;
        let preview_data_url = format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&png_bytes)
        );

        log::info!(
            "✅ 图标归一化成功 - 来源: {} 类型: {} 原始尺寸: {}x{} 绘制: {}x{}@({},{})",
            raw.source_hint,
            raw.content_type,
            src_width,
            src_height,
            fit.width,
            fit.height,
            fit.x,
            fit.y
        );

        Ok(NormalizedIcon {
            png_bytes,
            preview_data_url,
            fit,
        })
    }

    /// 仅通过内存中的图片头信息读取宽高。
    ///
    /// 用于在完整解码前做像素限制检查。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), IconError> {
        let cursor = Cursor::new(bytes);
        let reader = image::ImageReader::new(cursor)
            .with_guessed_format()
            .map_err(|e| IconError::Decode(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| IconError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(
        config: &NormalizerConfig,
        width: u32,
        height: u32,
    ) -> Result<(), IconError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| IconError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(IconError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &NormalizerConfig,
        width: u32,
        height: u32,
    ) -> Result<(), IconError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| IconError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(IconError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    /// 计算 contain 适配矩形。
    ///
    /// 长边恒等于画布边长；短边按宽高比取整缩放（至少 1 像素）并在该轴居中。
    pub(crate) fn compute_contain_rect(src_width: u32, src_height: u32, canvas: u32) -> FitRect {
        if src_width > src_height {
            let height = ((f64::from(canvas) * f64::from(src_height) / f64::from(src_width))
                .round() as u32)
                .clamp(1, canvas);
            FitRect {
                x: 0,
                y: (canvas - height) / 2,
                width: canvas,
                height,
            }
        } else {
            let width = ((f64::from(canvas) * f64::from(src_width) / f64::from(src_height))
                .round() as u32)
                .clamp(1, canvas);
            FitRect {
                x: (canvas - width) / 2,
                y: 0,
                width,
                height: canvas,
            }
        }
    }

    fn resize_with_fast_image_resize(
        src: &RgbaImage,
        target_width: u32,
        target_height: u32,
        filter: image::imageops::FilterType,
    ) -> Result<RgbaImage, IconError> {
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.as_raw().clone(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| IconError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(
            Self::to_fast_filter(filter),
        ));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| IconError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| IconError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
    }

    fn to_fast_filter(filter: image::imageops::FilterType) -> fr::FilterType {
        match filter {
            image::imageops::FilterType::Nearest => fr::FilterType::Box,
            image::imageops::FilterType::Triangle => fr::FilterType::Bilinear,
            image::imageops::FilterType::CatmullRom => fr::FilterType::CatmullRom,
            image::imageops::FilterType::Gaussian => fr::FilterType::Mitchell,
            image::imageops::FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }

    /// 无损 PNG 编码。
    fn encode_png(canvas: RgbaImage) -> Result<Vec<u8>, IconError> {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| IconError::Encode(format!("PNG 编码失败：{}", e)))?;
        Ok(cursor.into_inner())
    }
}
